pub mod completion;
pub mod profiles;
pub mod serve;
