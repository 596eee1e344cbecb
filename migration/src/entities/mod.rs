pub mod click;
pub mod link;
pub mod owner;
