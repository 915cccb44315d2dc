mod default_raptor;

pub use default_raptor::raptor;
pub(crate) use default_raptor::run_rounds;
