pub mod classification;
pub mod cuisine;
pub mod restaurant;
