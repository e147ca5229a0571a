//! Post-processing parameters and the host-side reference of the bright-pass, blur kernel and
//! tone-map composite. The GLSL in `renderer::shaders` implements the same formulas per pixel.

use glam::Vec3;

/// Rec. 709 luma weights used by the bright-pass threshold.
pub const LUMINANCE_WEIGHTS: Vec3 = Vec3::new(0.2126, 0.7152, 0.0722);

/// Centre tap followed by the four taps on each side of a 9-tap separable Gaussian.
pub const GAUSSIAN_WEIGHTS: [f32; 5] = [0.227027, 0.1945946, 0.1216216, 0.054054, 0.016216];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PostProcessParams {
    pub exposure: f32,
    pub gamma: f32,
    pub hdr: bool,
    pub bloom: bool,
}

impl Default for PostProcessParams {
    fn default() -> PostProcessParams {
        PostProcessParams {
            exposure: 1.0,
            gamma: 2.2,
            hdr: true,
            bloom: true,
        }
    }
}

impl PostProcessParams {
    /// Keeps exposure and gamma strictly positive after a UI edit or a state load.
    pub fn sanitized(mut self) -> PostProcessParams {
        if !(self.exposure > 0.0) {
            self.exposure = f32::EPSILON;
        }

        if !(self.gamma > 0.0) {
            self.gamma = PostProcessParams::default().gamma;
        }

        self
    }

    pub fn adjust_exposure(&mut self, delta: f32) {
        self.exposure = (self.exposure + delta).max(0.01);
    }
}

pub fn luminance(color: Vec3) -> f32 {
    color.dot(LUMINANCE_WEIGHTS)
}

pub fn bright_pass(color: Vec3, threshold: f32) -> Vec3 {
    if luminance(color) > threshold {
        color
    } else {
        Vec3::ZERO
    }
}

/// Exposure-scaled Reinhard.
pub fn tone_map(color: Vec3, exposure: f32) -> Vec3 {
    let exposed = color * exposure;
    exposed / (exposed + Vec3::ONE)
}

pub fn gamma_encode(color: Vec3, gamma: f32) -> Vec3 {
    color.powf(1.0 / gamma)
}

pub fn gamma_decode(color: Vec3, gamma: f32) -> Vec3 {
    color.powf(gamma)
}

/// With `hdr` off the scene colour is forwarded untouched. Otherwise bloom is added to the
/// linear colour before the tone curve, and gamma is applied last.
pub fn composite(scene: Vec3, bloom: Vec3, params: &PostProcessParams) -> Vec3 {
    if !params.hdr {
        return scene;
    }

    let mut color = scene;

    if params.bloom {
        color += bloom;
    }

    gamma_encode(tone_map(color, params.exposure), params.gamma)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlurAxis {
    Horizontal,
    Vertical,
}

/// One-dimensional Gaussian blur of a row or column with clamp-to-edge sampling.
pub fn blur_line(samples: &[Vec3]) -> Vec<Vec3> {
    let last = samples.len().saturating_sub(1) as isize;

    (0..samples.len() as isize)
        .map(|i| {
            let mut result = samples[i as usize] * GAUSSIAN_WEIGHTS[0];

            for (offset, weight) in GAUSSIAN_WEIGHTS.iter().enumerate().skip(1) {
                let offset = offset as isize;
                let right = (i + offset).min(last) as usize;
                let left = (i - offset).max(0) as usize;
                result += samples[right] * *weight;
                result += samples[left] * *weight;
            }

            result
        })
        .collect()
}

/// Host-side image used to check pass semantics without a GL context.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Vec3>,
}

impl Image {
    pub fn filled(width: usize, height: usize, color: Vec3) -> Image {
        Image {
            width,
            height,
            pixels: vec![color; width * height],
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Vec3 {
        self.pixels[y * self.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize, color: Vec3) {
        self.pixels[y * self.width + x] = color;
    }

    pub fn map(&self, f: impl Fn(Vec3) -> Vec3) -> Image {
        Image {
            width: self.width,
            height: self.height,
            pixels: self.pixels.iter().map(|p| f(*p)).collect(),
        }
    }

    pub fn blur(&self, axis: BlurAxis) -> Image {
        let mut out = self.clone();

        match axis {
            BlurAxis::Horizontal => {
                for y in 0..self.height {
                    let row = &self.pixels[y * self.width..(y + 1) * self.width];
                    out.pixels[y * self.width..(y + 1) * self.width]
                        .copy_from_slice(&blur_line(row));
                }
            }
            BlurAxis::Vertical => {
                for x in 0..self.width {
                    let column: Vec<Vec3> = (0..self.height).map(|y| self.get(x, y)).collect();

                    for (y, p) in blur_line(&column).into_iter().enumerate() {
                        out.set(x, y, p);
                    }
                }
            }
        }

        out
    }

    pub fn composite(&self, bloom: &Image, params: &PostProcessParams) -> Image {
        Image {
            width: self.width,
            height: self.height,
            pixels: self
                .pixels
                .iter()
                .zip(bloom.pixels.iter())
                .map(|(s, b)| composite(*s, *b, params))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3, eps: f32) -> bool {
        (a - b).abs().max_element() <= eps
    }

    #[test]
    fn kernel_sums_to_one() {
        let sum = GAUSSIAN_WEIGHTS[0] + 2.0 * GAUSSIAN_WEIGHTS[1..].iter().sum::<f32>();
        assert!((sum - 1.0).abs() < 1e-3);
    }

    #[test]
    fn tone_map_is_monotonic_in_exposure() {
        let colors = [
            Vec3::new(0.01, 0.5, 3.0),
            Vec3::new(10.0, 0.0, 100.0),
            Vec3::splat(1.0),
        ];

        for color in colors {
            let mut previous = Vec3::ZERO;

            for step in 1..200 {
                let params = PostProcessParams {
                    exposure: step as f32 * 0.05,
                    ..PostProcessParams::default()
                };
                let out = composite(color, Vec3::ZERO, &params);

                assert!(out.cmpge(previous).all(), "{:?} darkened {:?}", out, previous);
                previous = out;
            }
        }
    }

    #[test]
    fn gamma_round_trip() {
        for gamma in [1.0, 1.255, 2.2, 2.4] {
            for v in [0.0, 0.001, 0.18, 0.5, 0.99, 1.0] {
                let linear = Vec3::splat(v);
                let back = gamma_decode(gamma_encode(linear, gamma), gamma);
                assert!(close(back, linear, 1e-5));
            }
        }
    }

    #[test]
    fn hdr_off_forwards_scene_colour() {
        let scene = Vec3::new(4.5, 0.2, 0.0);

        for (exposure, gamma) in [(0.1, 1.0), (0.6, 1.255), (5.0, 2.2)] {
            let params = PostProcessParams {
                exposure,
                gamma,
                hdr: false,
                bloom: true,
            };
            assert_eq!(composite(scene, Vec3::splat(9.0), &params), scene);
        }
    }

    #[test]
    fn bloom_off_ignores_bloom_buffer() {
        let params = PostProcessParams {
            bloom: false,
            ..PostProcessParams::default()
        };
        let scene = Vec3::new(0.3, 1.2, 2.0);

        let a = composite(scene, Vec3::ZERO, &params);
        let b = composite(scene, Vec3::new(50.0, 1.0, 7.0), &params);

        assert_eq!(a, b);
    }

    #[test]
    fn bloom_is_added_before_tone_mapping() {
        let params = PostProcessParams::default();
        let scene = Vec3::splat(0.8);
        let bloom = Vec3::splat(0.8);

        let out = composite(scene, bloom, &params);
        let expected = gamma_encode(tone_map(scene + bloom, params.exposure), params.gamma);
        let added_after = gamma_encode(tone_map(scene, params.exposure) + bloom, params.gamma);

        assert!(close(out, expected, 1e-6));
        assert!(out.max_element() < 1.0);
        assert!(added_after.max_element() > 1.0);
    }

    #[test]
    fn black_bloom_is_plain_reinhard() {
        let params = PostProcessParams {
            exposure: 0.6,
            gamma: 1.255,
            hdr: true,
            bloom: true,
        };
        let scene = Vec3::new(2.0, 0.5, 0.1);

        let out = composite(scene, Vec3::ZERO, &params);

        let manual = Vec3::new(
            ((2.0 * 0.6) / (2.0 * 0.6 + 1.0) as f32).powf(1.0 / 1.255),
            ((0.5 * 0.6) / (0.5 * 0.6 + 1.0) as f32).powf(1.0 / 1.255),
            ((0.1 * 0.6) / (0.1 * 0.6 + 1.0) as f32).powf(1.0 / 1.255),
        );
        assert!(close(out, manual, 1e-6));
    }

    #[test]
    fn bright_pass_thresholds_on_luminance() {
        assert_eq!(bright_pass(Vec3::splat(0.9), 1.0), Vec3::ZERO);
        assert_eq!(bright_pass(Vec3::new(0.0, 2.0, 0.0), 1.0), Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(bright_pass(Vec3::new(0.0, 0.0, 5.0), 1.0), Vec3::ZERO);
    }

    #[test]
    fn blur_preserves_a_flat_field() {
        let line = vec![Vec3::splat(2.0); 16];
        for p in blur_line(&line) {
            assert!(close(p, Vec3::splat(2.0), 1e-3));
        }
    }

    #[test]
    fn blur_axis_only_spreads_along_that_axis() {
        let mut image = Image::filled(9, 9, Vec3::ZERO);
        image.set(4, 4, Vec3::ONE);

        let horizontal = image.blur(BlurAxis::Horizontal);

        assert!(horizontal.get(5, 4).x > 0.0);
        assert_eq!(horizontal.get(4, 5), Vec3::ZERO);

        let vertical = image.blur(BlurAxis::Vertical);

        assert!(vertical.get(4, 5).x > 0.0);
        assert_eq!(vertical.get(5, 4), Vec3::ZERO);
    }

    #[test]
    fn sanitized_rejects_non_positive_values() {
        let params = PostProcessParams {
            exposure: 0.0,
            gamma: -1.0,
            ..PostProcessParams::default()
        }
        .sanitized();

        assert!(params.exposure > 0.0);
        assert_eq!(params.gamma, 2.2);
    }
}
