/// Allocates names for synthesized temporaries. One generator is shared by
/// every pass in a pipeline run, so no two temporaries can collide.
#[derive(Default)]
pub struct Generator {
    counter: u32,
}

impl Generator {
    pub fn temp_name(&mut self) -> String {
        let n = self.counter;
        self.counter += 1;
        format!("_t{n}")
    }
}
