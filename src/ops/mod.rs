pub mod countdown;
pub mod interact;
pub mod sort;
