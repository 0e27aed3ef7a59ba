pub mod pricing;
pub mod system;
