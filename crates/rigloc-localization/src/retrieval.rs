use rigloc_core::GrayImage;

/// Grid resolution of the global appearance descriptor.
const DESCRIPTOR_GRID: usize = 8;

/// Compute the global appearance descriptor of a grayscale image.
///
/// The image is reduced to an 8x8 grid of mean intensities and the
/// resulting vector is L2-normalized, so two descriptors compare with a
/// plain dot product.
pub fn global_descriptor(image: &GrayImage) -> Vec<f32> {
    let width = image.width();
    let height = image.height();
    let data = image.as_slice();
    let mut descriptor = vec![0.0f32; DESCRIPTOR_GRID * DESCRIPTOR_GRID];

    if width == 0 || height == 0 {
        return descriptor;
    }

    for gy in 0..DESCRIPTOR_GRID {
        let y0 = gy * height / DESCRIPTOR_GRID;
        let y1 = ((gy + 1) * height / DESCRIPTOR_GRID).max(y0 + 1).min(height);
        if y0 >= height {
            continue;
        }
        for gx in 0..DESCRIPTOR_GRID {
            let x0 = gx * width / DESCRIPTOR_GRID;
            let x1 = ((gx + 1) * width / DESCRIPTOR_GRID).max(x0 + 1).min(width);
            if x0 >= width {
                continue;
            }
            let mut sum = 0u32;
            for y in y0..y1 {
                for x in x0..x1 {
                    sum += u32::from(data[y * width + x]);
                }
            }
            let count = ((y1 - y0) * (x1 - x0)) as f32;
            descriptor[gy * DESCRIPTOR_GRID + gx] = sum as f32 / count;
        }
    }

    normalize_l2(&mut descriptor);
    descriptor
}

/// Similarity of two L2-normalized descriptors in `[0, 1]`.
///
/// Descriptors of mismatched length never match.
pub fn similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    f64::from(dot.clamp(0.0, 1.0))
}

fn normalize_l2(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
