mod degraded_load;
mod login_reconciliation;
mod redirect_payment;
mod test_utils;
