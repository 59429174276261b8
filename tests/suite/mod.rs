mod dispatch;
mod edit;
mod persistence;
mod respond;
