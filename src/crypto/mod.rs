pub mod armor;
