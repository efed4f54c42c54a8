pub mod analyze;
pub mod compare;
pub mod init;
pub mod similarity;
pub mod validate;
