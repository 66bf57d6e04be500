#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Sigmoid {
    amp: f32,
}

impl Sigmoid {
    pub fn new(amp: f32) -> Self {
        Self { amp }
    }

    pub fn f(&self, z: f32) -> f32 {
        self.amp / (1. + (-z).exp())
    }

    /// Stays finite for every `z`: the logistic is bounded even when `exp(-z)` overflows.
    pub fn df(&self, z: f32) -> f32 {
        let s = 1. / (1. + (-z).exp());

        self.amp * s * (1. - s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturated_derivative_is_zero() {
        let sigmoid = Sigmoid::new(1.);

        for z in [-100., 100., -1e6, 1e6] {
            let df = sigmoid.df(z);
            assert!(df.is_finite(), "df({z}) = {df}");
            assert!(df.abs() < 1e-6, "df({z}) = {df}");
        }
        assert_eq!(sigmoid.f(-100.), 0.);
    }

    #[test]
    fn derivative_peaks_at_zero() {
        let sigmoid = Sigmoid::new(2.);

        assert!((sigmoid.df(0.) - 0.5).abs() < 1e-6);
        assert!(sigmoid.df(1.) < sigmoid.df(0.));
    }
}
