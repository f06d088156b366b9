use crate::source::Source;
use rand_distr::{Distribution as _, Normal};
use serde::{Deserialize, Serialize};

/// Tail cut of the discrete Gaussian, in standard deviations.
pub const GAUSSIAN_TAIL: f64 = 6.0;

/// Small-integer distributions used for secrets and noise.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Distribution {
    /// Uniform over {0, 1}.
    Binary,
    /// Uniform over {-1, 0, 1}.
    Ternary,
    /// Rounded Gaussian of standard deviation `sigma`, cut at [GAUSSIAN_TAIL] sigma.
    Gaussian { sigma: f64 },
    /// Always zero; debugging only.
    Zero,
}

impl Distribution {
    #[inline]
    pub fn sample(&self, source: &mut Source) -> i64 {
        match self {
            Distribution::Binary => source.next_bit() as i64,
            Distribution::Ternary => source.next_u64n(3, 0x3) as i64 - 1,
            Distribution::Gaussian { sigma } => sample_gaussian(source, *sigma),
            Distribution::Zero => 0,
        }
    }

    pub fn fill(&self, source: &mut Source, out: &mut [i64]) {
        out.iter_mut().for_each(|x| *x = self.sample(source));
    }

    /// Largest absolute value the distribution can return.
    pub fn bound(&self) -> u64 {
        match self {
            Distribution::Binary | Distribution::Ternary => 1,
            Distribution::Gaussian { sigma } => (sigma * GAUSSIAN_TAIL).ceil() as u64,
            Distribution::Zero => 0,
        }
    }
}

fn sample_gaussian(source: &mut Source, sigma: f64) -> i64 {
    if sigma <= 0.0 {
        return 0;
    }
    let bound: f64 = sigma * GAUSSIAN_TAIL;
    // sigma > 0 is finite here, so construction cannot fail
    let normal: Normal<f64> = match Normal::new(0.0, sigma) {
        Ok(normal) => normal,
        Err(_) => return 0,
    };
    loop {
        let x: f64 = normal.sample(source);
        if x.abs() <= bound {
            return x.round() as i64;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Distribution;
    use crate::source::Source;

    #[test]
    fn ternary_covers_support() {
        let mut source: Source = Source::new([0u8; 32]);
        let mut seen: [bool; 3] = [false; 3];
        for _ in 0..1000 {
            let x: i64 = Distribution::Ternary.sample(&mut source);
            assert!((-1..=1).contains(&x));
            seen[(x + 1) as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn gaussian_is_centered_and_bounded() {
        let mut source: Source = Source::new([1u8; 32]);
        let dist: Distribution = Distribution::Gaussian { sigma: 3.19 };
        let mut samples: Vec<i64> = vec![0; 20000];
        dist.fill(&mut source, &mut samples);
        let bound: i64 = dist.bound() as i64;
        assert!(samples.iter().all(|x| x.abs() <= bound));
        let mean: f64 = samples.iter().sum::<i64>() as f64 / samples.len() as f64;
        let var: f64 = samples.iter().map(|x| (*x as f64 - mean).powi(2)).sum::<f64>()
            / samples.len() as f64;
        assert!(mean.abs() < 0.2, "mean = {}", mean);
        assert!((var.sqrt() - 3.19).abs() < 0.2, "std = {}", var.sqrt());
    }
}
