/// An error type for the image module.
#[derive(thiserror::Error, Debug)]
pub enum ImageError {
    /// Error when the data length does not match the image shape.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),
}

/// Image size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageSize {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "ImageSize {{ width: {}, height: {} }}",
            self.width, self.height
        )
    }
}

/// A single-channel (grayscale) image with row-major pixel storage.
///
/// This is the only image representation the localization pipeline consumes;
/// feeds decode their media into it before handing frames over.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayImage {
    size: ImageSize,
    data: Vec<u8>,
}

impl GrayImage {
    /// Create a new image from pixel data.
    ///
    /// The data length must be exactly `width * height`.
    pub fn new(size: ImageSize, data: Vec<u8>) -> Result<Self, ImageError> {
        let expected = size.width * size.height;
        if data.len() != expected {
            return Err(ImageError::InvalidChannelShape(data.len(), expected));
        }
        Ok(Self { size, data })
    }

    /// Create an image of the given size with every pixel set to `val`.
    pub fn from_size_val(size: ImageSize, val: u8) -> Self {
        Self {
            size,
            data: vec![val; size.width * size.height],
        }
    }

    /// The size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// The width of the image in pixels.
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// The height of the image in pixels.
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// The pixel data as a flat row-major slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_checks_shape() {
        let size = ImageSize {
            width: 3,
            height: 2,
        };
        assert!(GrayImage::new(size, vec![0u8; 6]).is_ok());
        assert!(matches!(
            GrayImage::new(size, vec![0u8; 5]),
            Err(ImageError::InvalidChannelShape(5, 6))
        ));
    }

    #[test]
    fn from_size_val_fills() {
        let img = GrayImage::from_size_val(
            ImageSize {
                width: 4,
                height: 2,
            },
            7,
        );
        assert_eq!(img.width(), 4);
        assert_eq!(img.height(), 2);
        assert!(img.as_slice().iter().all(|&p| p == 7));
    }
}
