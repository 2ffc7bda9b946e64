use rand::distributions::{Distribution, Uniform};
use rand::SeedableRng;
use rand_pcg::Pcg64;

/// Normal-variate generator built on the Box–Muller transform.
///
/// Each transform consumes two uniform draws and yields two normal draws;
/// the second is buffered and handed out on the following [`Gaussian::next`]
/// call, matching the classic queue-of-two formulation.
pub struct Gaussian {
    rng: Pcg64,
    uniform: Uniform<f64>,
    mean: f64,
    sd: f64,
    spare: Option<f64>,
}

impl Gaussian {
    /// Sampler seeded from entropy.
    pub fn new(mean: f64, sd: f64) -> Gaussian {
        Gaussian::from_rng(Pcg64::from_entropy(), mean, sd)
    }

    /// Sampler with a fixed seed. Two instances built with the same seed
    /// emit identical sequences.
    pub fn seeded(seed: u64, mean: f64, sd: f64) -> Gaussian {
        Gaussian::from_rng(Pcg64::seed_from_u64(seed), mean, sd)
    }

    fn from_rng(rng: Pcg64, mean: f64, sd: f64) -> Gaussian {
        Gaussian {
            rng,
            uniform: Uniform::new(0.0, 1.0),
            mean,
            sd,
            spare: None,
        }
    }

    /// Next normal draw.
    pub fn next(&mut self) -> f64 {
        if let Some(z) = self.spare.take() {
            return z;
        }

        // ln(0) is undefined; the uniform range is [0, 1) so re-draw until
        // x is strictly positive.
        let mut x = self.uniform.sample(&mut self.rng);
        while x <= 0.0 {
            x = self.uniform.sample(&mut self.rng);
        }
        let y = self.uniform.sample(&mut self.rng);

        let r = self.sd * (-2.0 * x.ln()).sqrt();
        let theta = 2.0 * std::f64::consts::PI * y;

        let z1 = r * theta.cos() + self.mean;
        let z2 = r * theta.sin() + self.mean;

        self.spare = Some(z2);
        z1
    }
}
