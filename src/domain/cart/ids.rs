use crate::int_id;

int_id!(LineItemId);
int_id!(ProductId);
int_id!(VariantId);
int_id!(ShopId);
int_id!(AddressId);
