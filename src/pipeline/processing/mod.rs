// Pipeline processing: field resolution, date normalization, location disambiguation

pub mod normalize;
