mod bulge;
mod linspace;

pub use {bulge::earth_bulge_m, linspace::linspace};
