/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: CC0-1.0
 */

use super::*;
use rand::{thread_rng, Rng};

fn entry(y: u8, cb: u8, cr: u8, alpha: u8) -> PaletteEntry {
    PaletteEntry { y, cr, cb, alpha }
}

#[test]
fn test_coefficients_by_height() {
    assert_eq!(Coefficients::for_height(1080), Coefficients::Bt709);
    assert_eq!(Coefficients::for_height(600), Coefficients::Bt709);
    assert_eq!(Coefficients::for_height(599), Coefficients::Bt601);
    assert_eq!(Coefficients::for_height(480), Coefficients::Bt601);
}

#[test]
fn test_black_and_white() {
    for coefficients in [Coefficients::Bt709, Coefficients::Bt601] {
        assert_eq!(
            rgba_pixel(&entry(16, 128, 128, 255), coefficients),
            Rgba { red: 0, green: 0, blue: 0, alpha: 255 },
        );

        let white = rgba_pixel(&entry(235, 128, 128, 255), coefficients);

        assert!(white.red >= 254);
        assert_eq!(white.red, white.green);
        assert_eq!(white.green, white.blue);
    }
}

#[test]
fn test_out_of_range_clamps() {
    assert_eq!(
        rgba_pixel(&entry(0, 128, 128, 0), Coefficients::Bt709),
        Rgba { red: 0, green: 0, blue: 0, alpha: 0 },
    );
    assert_eq!(
        rgba_pixel(&entry(255, 128, 128, 0), Coefficients::Bt709),
        Rgba { red: 255, green: 255, blue: 255, alpha: 0 },
    );
}

#[test]
fn test_pure_red_bt601() {

    // Limited-range BT.601 red.
    let red = rgba_pixel(&entry(81, 90, 240, 128), Coefficients::Bt601);

    assert!(red.red >= 250);
    assert!(red.green <= 5);
    assert!(red.blue <= 5);
    assert_eq!(red.alpha, 128);
}

#[test]
fn test_primaries_differ_for_chroma() {

    let sample = entry(120, 60, 200, 255);

    assert_ne!(
        rgba_pixel(&sample, Coefficients::Bt709),
        rgba_pixel(&sample, Coefficients::Bt601),
    );
}

#[test]
fn test_alpha_is_copied_and_grey_is_neutral() {

    let mut rng = thread_rng();

    for _ in 0..1000 {

        let y = rng.gen_range(16..=235);
        let alpha = rng.gen();
        let rgba = rgba_pixel(&entry(y, 128, 128, alpha), Coefficients::Bt709);

        assert_eq!(rgba.alpha, alpha);
        assert_eq!(rgba.red, rgba.green);
        assert_eq!(rgba.green, rgba.blue);
    }
}
