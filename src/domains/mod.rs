pub mod bedroom;
pub mod climate;
pub mod compass;
pub mod crime;
pub mod emf;
pub mod esoteric;
pub mod feng_shui;
pub mod vastu;
