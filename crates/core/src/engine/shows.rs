use anyhow::{bail, ensure, Result};

use crate::patch::RenderFixture;
use crate::show::Show;

use super::fade::sine_fade;

/// Maps a fixture index through the show's direction mode.
///
/// 0 runs reversed, 1 forward, 2 mirrors the second half back onto the
/// first, 3 mirrors with reversed halves. `recenter` shifts mode 3 down
/// by half the run, which the fading chase variants need so both halves
/// start a cycle together.
pub fn mirror_index(f: f64, count: f64, direction: u8, recenter: bool) -> f64 {
    match direction {
        0 => count - f,
        2 => {
            if f > count / 2.0 {
                count - f
            } else {
                f
            }
        }
        3 => {
            let mut offset = count - f;
            if f > count / 2.0 {
                offset = f;
            }
            if recenter {
                offset -= count / 2.0;
            }
            offset
        }
        _ => f,
    }
}

/// Evaluates one tick of a show over its fixtures, advancing nothing:
/// the caller owns the counter increment. The counter is still passed
/// mutably because several algorithms reset it when a cycle completes.
pub fn render_show(show: &Show, counter: &mut u32, fixtures: &mut [RenderFixture]) -> Result<()> {
    ensure!(!show.colors_list.is_empty(), "show has an empty color list");

    match show.kind {
        1 => static_blocks(show, fixtures),
        2 => all_fade(show, counter, fixtures),
        3 => all_flash(show, counter, fixtures),
        4 => chase(show, counter, fixtures),
        5 => fade_chase(show, counter, fixtures),
        6 => fluid_chase(show, counter, fixtures),
        other => bail!("unknown show type {}", other),
    }
}

fn color_at(colors: &[[u8; 3]], index: f64) -> Result<[u8; 3]> {
    ensure!(
        index.is_finite() && index >= 0.0 && (index as usize) < colors.len(),
        "color index {} out of range ({} colors)",
        index,
        colors.len()
    );
    Ok(colors[index as usize])
}

/// Rounding to four decimals keeps the per-pixel timing stable across
/// cycle-length comparisons.
fn round_to4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Type 1: partition the run into one contiguous block per color.
fn static_blocks(show: &Show, fixtures: &mut [RenderFixture]) -> Result<()> {
    let colors = &show.colors_list;
    let count = fixtures.len() as f64;
    let n = colors.len();

    for (f, fixture) in fixtures.iter_mut().enumerate() {
        let index = ((f as f64 / count * n as f64).floor() as usize) % n;
        fixture.color = colors[index];
    }
    Ok(())
}

/// Type 2: every fixture shares one color crossfading through the list.
fn all_fade(show: &Show, counter: &mut u32, fixtures: &mut [RenderFixture]) -> Result<()> {
    let colors = &show.colors_list;
    let n = colors.len();
    let fade_time = (show.total_time() / n as f64).round();
    ensure!(fade_time > 0.0, "fade span collapsed to zero");

    let fade_counter = (*counter as f64 % fade_time).round();
    let mut current = (*counter as f64 / fade_time).floor() as usize;
    let mut next = current + 1;
    if next >= n {
        next = 0;
    }
    if current >= n {
        current = 0;
        next = 0;
        *counter = 0;
    }

    let c1 = colors[current];
    let c2 = colors[next];
    let color = [
        sine_fade(c1[0], c2[0], fade_time, fade_counter),
        sine_fade(c1[1], c2[1], fade_time, fade_counter),
        sine_fade(c1[2], c2[2], fade_time, fade_counter),
    ];
    for fixture in fixtures.iter_mut() {
        fixture.color = color;
    }
    Ok(())
}

/// Type 3: every fixture shares one color hard-switching through the list.
fn all_flash(show: &Show, counter: &mut u32, fixtures: &mut [RenderFixture]) -> Result<()> {
    let colors = &show.colors_list;
    let n = colors.len();
    let per_color = (show.total_time() / n as f64).floor();
    ensure!(per_color > 0.0, "flash span collapsed to zero");

    let mut index = (*counter as f64 / per_color).floor() as usize;
    if index >= n {
        index = 0;
        *counter = 0;
    }

    let color = colors[index];
    for fixture in fixtures.iter_mut() {
        fixture.color = color;
    }
    Ok(())
}

/// Segment width in pixels; sizes 11-20 select a fraction of the run.
fn segment_pixels(size: u8, count: f64) -> Result<f64> {
    if size >= 11 {
        let percent = 21.0 - size as f64;
        ensure!(percent > 0.0, "size {} out of range", size);
        Ok((count / percent).round())
    } else {
        Ok(size as f64)
    }
}

/// Type 4: hard-edged segments of color marching along the run.
fn chase(show: &Show, counter: &mut u32, fixtures: &mut [RenderFixture]) -> Result<()> {
    let colors = &show.colors_list;
    let n = colors.len();
    let count = fixtures.len() as f64;
    let total_time = show.total_time();

    let pixels_per_segment = segment_pixels(show.size, count)?.max(1.0);
    let total_pixels = pixels_per_segment * n as f64;
    let time_per_pixel = total_time / total_pixels;
    let the_offset = (*counter as f64 / time_per_pixel).round();
    if *counter as f64 > time_per_pixel * total_pixels {
        *counter = 0;
    }

    for (f, fixture) in fixtures.iter_mut().enumerate() {
        let offset_f = mirror_index(f as f64, count, show.direction, false);
        let new_f = offset_f + the_offset;
        let segment = (new_f / pixels_per_segment).floor();
        let index = (segment as usize) % n;
        fixture.color = colors[index];
    }
    Ok(())
}

/// Type 5: like chase, but the tail of each segment crossfades into the
/// next color while the head holds solid.
fn fade_chase(show: &Show, counter: &mut u32, fixtures: &mut [RenderFixture]) -> Result<()> {
    let colors = &show.colors_list;
    let n = colors.len() as f64;
    let count = fixtures.len() as f64;
    let total_time = show.total_time();

    let pixels_per_color = segment_pixels(show.size, count)?;
    let pixels_to_fade = if show.size >= 11 {
        (count / 10.0).ceil()
    } else {
        (show.size as f64 / 3.0).ceil()
    };
    ensure!(pixels_per_color >= 1.0, "segment size rounds to zero");

    let static_per_color = pixels_per_color - pixels_to_fade;
    let time_per_pixel = round_to4(total_time / (pixels_per_color * n));
    ensure!(time_per_pixel > 0.0, "per-pixel time collapsed to zero");
    let fade_steps = pixels_to_fade * time_per_pixel;

    if *counter as f64 >= time_per_pixel * pixels_per_color * n {
        *counter = 0;
    }
    let c = *counter as f64;

    for (f, fixture) in fixtures.iter_mut().enumerate() {
        let offset_f = mirror_index(f as f64, count, show.direction, true);
        let new_f = offset_f + (c / time_per_pixel).floor();

        let pixel_in_color = (new_f % pixels_per_color).floor();
        let current_step =
            (c % time_per_pixel).floor() + (pixel_in_color - static_per_color) * time_per_pixel;

        let current = ((new_f / pixels_per_color).floor() % n).floor();
        let next = ((current + 1.0) % n).floor();
        let c1 = color_at(colors, current)?;
        let c2 = color_at(colors, next)?;

        if pixel_in_color >= static_per_color {
            fixture.color = [
                sine_fade(c1[0], c2[0], fade_steps, current_step),
                sine_fade(c1[1], c2[1], fade_steps, current_step),
                sine_fade(c1[2], c2[2], fade_steps, current_step),
            ];
        } else {
            fixture.color = c1;
        }
    }
    Ok(())
}

/// Type 6: a continuously fading chase with a splits replication factor
/// and a two-pass wraparound that folds remainder pixels into the last
/// color's fade, so the cycle boundary shows no seam.
fn fluid_chase(show: &Show, counter: &mut u32, fixtures: &mut [RenderFixture]) -> Result<()> {
    let colors = &show.colors_list;
    let n = colors.len() as f64;
    let count = fixtures.len() as f64;
    let total_time = show.total_time();

    let splits = show
        .splits_factor()
        .ok_or_else(|| anyhow::anyhow!("splits index {} out of range", show.splits))?
        as f64;
    let loop_length = count / splits;
    let mut pixel_run = loop_length.round();
    if show.direction == 2 || show.direction == 3 {
        pixel_run = (loop_length / 2.0).round();
    }

    let last_index = n - 1.0;
    let pixels_per_color = (pixel_run / n).floor();
    ensure!(pixels_per_color >= 1.0, "fewer pixels than colors in the run");
    let pixels_per_last = pixel_run - last_index * pixels_per_color;
    let extra_pixels = pixels_per_last - pixels_per_color;

    let time_per_pixel = round_to4(total_time / pixel_run);
    ensure!(time_per_pixel > 0.0, "per-pixel time collapsed to zero");
    let time_per_color = time_per_pixel * pixels_per_color;
    let time_per_last = time_per_pixel * pixels_per_last;

    // The cycle closes when every pixel has walked the run once, which is
    // usually shy of the nominal total time; resetting here is what makes
    // the loop seamless.
    if *counter as f64 >= time_per_pixel * pixel_run {
        *counter = 0;
    }
    let c = *counter as f64;

    let stride = (count / splits).round() as usize;

    for f in 0..loop_length.ceil() as usize {
        let offset_f = mirror_index(f as f64, count, show.direction, true);
        let new_f = offset_f + (c / time_per_pixel).floor();

        let mut pixel_in_color = (new_f % pixels_per_color).floor();
        let mut fade_steps = time_per_color;
        let mut current = (new_f / pixels_per_color).floor();

        // Pixels in the last color's stretch fade over its longer span.
        if new_f >= last_index * pixels_per_color && new_f < pixel_run {
            fade_steps = time_per_last;
        }
        // Second pass around the run.
        if new_f >= pixel_run {
            pixel_in_color = ((new_f - pixel_run) % pixels_per_color).floor();
            current = (((new_f - extra_pixels) / pixels_per_color).floor() % n).floor();
        }
        // Remainder pixels at the end fold into the final color's fade.
        if new_f >= n * pixels_per_color && new_f < pixel_run {
            fade_steps = time_per_last;
            pixel_in_color += pixels_per_color;
            current -= 1.0;
        }
        if new_f >= pixel_run * 2.0 - pixels_per_last {
            fade_steps = time_per_last;
        }
        if new_f >= n * pixels_per_color + pixel_run && new_f < pixel_run * 2.0 {
            pixel_in_color += pixels_per_color;
            current = last_index;
        }

        let next = ((current + 1.0) % n).floor();
        let current_step = (c % time_per_pixel).floor() + pixel_in_color * time_per_pixel;

        let c1 = color_at(colors, current)?;
        let c2 = color_at(colors, next)?;
        let color = [
            sine_fade(c1[0], c2[0], fade_steps, current_step),
            sine_fade(c1[1], c2[1], fade_steps, current_step),
            sine_fade(c1[2], c2[2], fade_steps, current_step),
        ];

        for j in 0..splits as usize {
            if let Some(fixture) = fixtures.get_mut(f + j * stride) {
                fixture.color = color;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use lumen_fixtures::ColorMode;

    use super::*;

    const RED: [u8; 3] = [255, 0, 0];
    const GREEN: [u8; 3] = [0, 255, 0];
    const BLUE: [u8; 3] = [0, 0, 255];

    fn fixtures(count: usize) -> Vec<RenderFixture> {
        (0..count)
            .map(|i| RenderFixture {
                universe: 1,
                start_address: 1 + (i as u16) * 3,
                color_mode: ColorMode::Rgb,
                color: [0, 0, 0],
            })
            .collect()
    }

    fn show(kind: u8, colors: Vec<[u8; 3]>) -> Show {
        Show {
            id: 1,
            name: "test".to_string(),
            kind,
            colors_list: colors,
            speed: 50,
            size: 3,
            direction: 1,
            splits: 1,
        }
    }

    #[test]
    fn static_show_partitions_into_equal_blocks() {
        let show = show(1, vec![RED, GREEN, BLUE]);
        let mut fixtures = fixtures(9);
        let mut counter = 0;
        render_show(&show, &mut counter, &mut fixtures).unwrap();

        let colors: Vec<[u8; 3]> = fixtures.iter().map(|f| f.color).collect();
        assert_eq!(&colors[0..3], &[RED, RED, RED]);
        assert_eq!(&colors[3..6], &[GREEN, GREEN, GREEN]);
        assert_eq!(&colors[6..9], &[BLUE, BLUE, BLUE]);
    }

    #[test]
    fn static_show_ignores_the_counter() {
        let show = show(1, vec![RED, GREEN]);
        let mut a = fixtures(4);
        let mut b = fixtures(4);
        let mut c0 = 0;
        let mut c1 = 123;
        render_show(&show, &mut c0, &mut a).unwrap();
        render_show(&show, &mut c1, &mut b).unwrap();

        let colors_a: Vec<_> = a.iter().map(|f| f.color).collect();
        let colors_b: Vec<_> = b.iter().map(|f| f.color).collect();
        assert_eq!(colors_a, colors_b);
    }

    #[test]
    fn all_fade_starts_on_the_first_color() {
        let show = show(2, vec![RED, BLUE]);
        let mut fixtures = fixtures(3);
        let mut counter = 0;
        render_show(&show, &mut counter, &mut fixtures).unwrap();

        assert!(fixtures.iter().all(|f| f.color == fixtures[0].color));
        assert_eq!(fixtures[0].color, RED);
    }

    #[test]
    fn all_fade_reaches_the_second_color_mid_cycle() {
        let show = show(2, vec![RED, BLUE]);
        let fade_time = (show.total_time() / 2.0).round() as u32;
        let mut fixtures = fixtures(1);
        let mut counter = fade_time;
        render_show(&show, &mut counter, &mut fixtures).unwrap();
        assert_eq!(fixtures[0].color, BLUE);
    }

    #[test]
    fn all_flash_switches_without_fading() {
        let show = show(3, vec![RED, GREEN, BLUE]);
        let per_color = (show.total_time() / 3.0).floor() as u32;
        let mut fx = fixtures(2);

        let mut counter = 0;
        render_show(&show, &mut counter, &mut fx).unwrap();
        assert_eq!(fx[0].color, RED);

        let mut counter = per_color;
        render_show(&show, &mut counter, &mut fx).unwrap();
        assert_eq!(fx[0].color, GREEN);

        let mut counter = per_color * 2;
        render_show(&show, &mut counter, &mut fx).unwrap();
        assert_eq!(fx[0].color, BLUE);
    }

    #[test]
    fn all_flash_resets_past_the_last_color() {
        let show = show(3, vec![RED, GREEN]);
        let per_color = (show.total_time() / 2.0).floor() as u32;
        let mut fx = fixtures(1);

        let mut counter = per_color * 2;
        render_show(&show, &mut counter, &mut fx).unwrap();
        assert_eq!(fx[0].color, RED);
        assert_eq!(counter, 0);
    }

    #[test]
    fn chase_lays_out_segments_at_tick_zero() {
        let mut s = show(4, vec![RED, BLUE]);
        s.size = 3;
        let mut fx = fixtures(12);
        let mut counter = 0;
        render_show(&s, &mut counter, &mut fx).unwrap();

        let colors: Vec<[u8; 3]> = fx.iter().map(|f| f.color).collect();
        assert_eq!(&colors[0..3], &[RED, RED, RED]);
        assert_eq!(&colors[3..6], &[BLUE, BLUE, BLUE]);
        assert_eq!(&colors[6..9], &[RED, RED, RED]);
    }

    #[test]
    fn chase_direction_zero_reverses_the_run() {
        let mut forward_show = show(4, vec![RED, BLUE]);
        forward_show.size = 6;
        let mut reversed_show = forward_show.clone();
        reversed_show.direction = 0;

        let mut forward = fixtures(12);
        let mut reversed = fixtures(12);
        let mut c0 = 0;
        let mut c1 = 0;
        render_show(&forward_show, &mut c0, &mut forward).unwrap();
        render_show(&reversed_show, &mut c1, &mut reversed).unwrap();

        // Fixture f reversed lands on index count - f; fixture 0 maps to
        // the full count, which wraps back onto the first color.
        assert_eq!(forward[1].color, RED);
        assert_eq!(reversed[1].color, BLUE);
        assert_eq!(reversed[0].color, RED);
    }

    #[test]
    fn chase_percentage_size_scales_with_the_run() {
        let mut s = show(4, vec![RED, BLUE]);
        s.size = 11; // one tenth of the run
        let mut fx = fixtures(40);
        let mut counter = 0;
        render_show(&s, &mut counter, &mut fx).unwrap();

        let colors: Vec<[u8; 3]> = fx.iter().map(|f| f.color).collect();
        assert_eq!(&colors[0..4], &[RED; 4]);
        assert_eq!(&colors[4..8], &[BLUE; 4]);
    }

    #[test]
    fn fade_chase_holds_the_segment_head_solid() {
        let mut s = show(5, vec![RED, BLUE]);
        s.size = 6; // 2 fading pixels per segment
        let mut fx = fixtures(12);
        let mut counter = 0;
        render_show(&s, &mut counter, &mut fx).unwrap();

        // Head of the first segment holds solid red; the tail is fading.
        assert_eq!(fx[0].color, RED);
        assert_eq!(fx[3].color, RED);
        assert_ne!(fx[5].color, RED);
    }

    #[test]
    fn empty_color_list_is_an_error() {
        let show = show(2, vec![]);
        let mut fx = fixtures(3);
        let mut counter = 0;
        assert!(render_show(&show, &mut counter, &mut fx).is_err());
    }

    #[test]
    fn unknown_show_type_is_an_error() {
        let show = show(9, vec![RED]);
        let mut fx = fixtures(3);
        let mut counter = 0;
        assert!(render_show(&show, &mut counter, &mut fx).is_err());
    }

    #[test]
    fn fluid_chase_needs_enough_pixels() {
        let show = show(6, vec![RED, GREEN, BLUE]);
        let mut fx = fixtures(2);
        let mut counter = 0;
        assert!(render_show(&show, &mut counter, &mut fx).is_err());
    }

    #[test]
    fn fluid_chase_replicates_across_splits() {
        let mut s = show(6, vec![RED, BLUE]);
        s.splits = 2;
        let mut fx = fixtures(12);
        let mut counter = 0;
        render_show(&s, &mut counter, &mut fx).unwrap();

        let colors: Vec<[u8; 3]> = fx.iter().map(|f| f.color).collect();
        assert_eq!(&colors[0..6], &colors[6..12]);
    }

    #[test]
    fn mirror_index_modes() {
        assert_eq!(mirror_index(2.0, 10.0, 1, false), 2.0);
        assert_eq!(mirror_index(2.0, 10.0, 0, false), 8.0);
        assert_eq!(mirror_index(2.0, 10.0, 2, false), 2.0);
        assert_eq!(mirror_index(8.0, 10.0, 2, false), 2.0);
        assert_eq!(mirror_index(2.0, 10.0, 3, false), 8.0);
        assert_eq!(mirror_index(8.0, 10.0, 3, false), 8.0);
        assert_eq!(mirror_index(2.0, 10.0, 3, true), 3.0);
        assert_eq!(mirror_index(8.0, 10.0, 3, true), 3.0);
    }
}
