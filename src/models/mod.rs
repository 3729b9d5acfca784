pub mod estimate;
pub mod shading;
