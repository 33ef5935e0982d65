pub mod simd8;
pub mod software;

pub use simd8::Simd8Cfu;
pub use software::SoftwareCfu;
