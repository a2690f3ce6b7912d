
mod account_test;
mod contract_test;
mod delivery_test;
mod password_test;
