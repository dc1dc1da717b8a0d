// Order line-item workflow
pub mod orders;
