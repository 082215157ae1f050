//! Aggregate statistics over a Peblob's grid.
//!
//! Kept as free functions over the data record so the model stays a plain
//! serializable struct.

use crate::models::{Peblob, Ptiblob};

/// Mean brightness across all cells, in [0, 255]. Zero-cell structures yield
/// `0.0` (not reachable once the square invariant holds with size >= 1).
pub fn average_brightness(peblob: &Peblob) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for row in &peblob.structure {
        for cell in row {
            sum += cell.brightness();
            count += 1;
        }
    }
    if count == 0 {
        return 0.0;
    }
    sum / count as f64
}

/// Componentwise mean color across all cells, rounded to nearest integer.
/// Black for zero-cell input.
pub fn dominant_color(peblob: &Peblob) -> Ptiblob {
    let (mut r, mut g, mut b) = (0u64, 0u64, 0u64);
    let mut count = 0u64;
    for row in &peblob.structure {
        for cell in row {
            r += cell.r as u64;
            g += cell.g as u64;
            b += cell.b as u64;
            count += 1;
        }
    }
    if count == 0 {
        return Ptiblob::new(0, 0, 0);
    }
    let mean = |total: u64| (total as f64 / count as f64).round() as u8;
    Ptiblob::new(mean(r), mean(g), mean(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peblob_of(structure: Vec<Vec<Ptiblob>>) -> Peblob {
        Peblob::new(None, None, structure)
    }

    #[test]
    fn uniform_white_grid_has_brightness_255() {
        let peblob = peblob_of(vec![vec![Ptiblob::new(255, 255, 255); 3]; 3]);
        assert_eq!(average_brightness(&peblob), 255.0);
    }

    #[test]
    fn all_zero_grid_has_brightness_0() {
        let peblob = peblob_of(vec![vec![Ptiblob::new(0, 0, 0); 4]; 4]);
        assert_eq!(average_brightness(&peblob), 0.0);
    }

    #[test]
    fn zero_cell_structure_defaults_to_zero() {
        let peblob = peblob_of(vec![]);
        assert_eq!(average_brightness(&peblob), 0.0);
        assert_eq!(dominant_color(&peblob), Ptiblob::new(0, 0, 0));
    }

    #[test]
    fn dominant_color_of_single_cell_is_identity() {
        let peblob = peblob_of(vec![vec![Ptiblob::new(10, 20, 30)]]);
        assert_eq!(dominant_color(&peblob), Ptiblob::new(10, 20, 30));
    }

    #[test]
    fn dominant_color_rounds_componentwise_mean() {
        // Means: r = 127.5 -> 128, g = 1.5 -> 2, b = 0.
        let peblob = peblob_of(vec![
            vec![Ptiblob::new(255, 1, 0), Ptiblob::new(0, 2, 0)],
            vec![Ptiblob::new(255, 1, 0), Ptiblob::new(0, 2, 0)],
        ]);
        assert_eq!(dominant_color(&peblob), Ptiblob::new(128, 2, 0));
    }
}
