/// A source of values for the placeholder global model.
pub trait ParamGen {
    /// Should sample at most `n` parameters.
    ///
    /// # Returns
    /// `None` once the generator is exhausted.
    fn sample(&mut self, n: usize) -> Option<Vec<f32>>;

    /// Samples exactly `n` parameters, calling `sample` as many times as needed.
    ///
    /// # Returns
    /// `None` if the generator runs dry before `n` values were produced.
    fn fill(&mut self, n: usize) -> Option<Vec<f32>> {
        let mut values = Vec::with_capacity(n);

        while values.len() < n {
            values.extend(self.sample(n - values.len())?);
        }

        Some(values)
    }
}
