#[derive(Debug, Clone)]
pub struct Config {
    // Margin added around every stored box so small movements stay in place.
    pub aabb_extension: f32,
    // Scales per-step displacement when predicting where a moved box lands.
    pub aabb_multiplier: f32,
    pub initial_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            aabb_extension: 0.1,
            aabb_multiplier: 2.0,
            initial_capacity: 16,
        }
    }
}
