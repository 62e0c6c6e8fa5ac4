mod checkout;
mod helpers;
mod ipn;
mod mocks;
