//! Image decoding and per-channel means.

use image::RgbImage;

use crate::classify::ChannelAverages;
use crate::imaging::FetchError;

/// Decode an encoded image (format sniffed from its bytes) and average each
/// color channel. Alpha is discarded, not composited.
pub fn decode_averages(bytes: &[u8]) -> Result<ChannelAverages, FetchError> {
    let image = image::load_from_memory(bytes)?.to_rgb8();
    channel_averages(&image).ok_or(FetchError::EmptyImage)
}

/// Arithmetic mean of each channel, `None` for a zero-sized image.
pub fn channel_averages(image: &RgbImage) -> Option<ChannelAverages> {
    let count = u64::from(image.width()) * u64::from(image.height());
    if count == 0 {
        return None;
    }

    let mut sums = [0u64; 3];
    for pixel in image.pixels() {
        for (sum, value) in sums.iter_mut().zip(pixel.0) {
            *sum += u64::from(value);
        }
    }

    let n = count as f64;
    Some(ChannelAverages::new(
        sums[0] as f64 / n,
        sums[1] as f64 / n,
        sums[2] as f64 / n,
    ))
}
