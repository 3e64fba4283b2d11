//! Grid-level behavior through the public API.
//!
//! Run: cargo test --test grid_test

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use rtplot::prelude::*;

fn rejected_size(result: Result<()>) -> Option<(usize, usize)> {
    match result {
        Err(Error::InvalidGridSize { rows, cols }) => Some((rows, cols)),
        _ => None,
    }
}

fn wait_until(timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    done()
}

#[test]
fn test_two_by_two_grid_creates_only_used_plot() {
    let grid = PlotGrid::new(HeadlessBackend::new());
    grid.set_grid_size(2, 2).unwrap();
    grid.add_point(0, 7, 1.0, 2.0).unwrap();

    let (created, points) = grid.with_plots(|plots| {
        let created: Vec<bool> = plots.iter().map(Option::is_some).collect();
        let points = plots[0].as_ref().and_then(|p| p.engine().curve_points(7));
        (created, points)
    });
    assert_eq!(created, vec![true, false, false, false]);
    assert_eq!(points, Some(vec![Point::new(1.0, 2.0)]));
}

#[test]
fn test_single_row_or_column_rejected() {
    let grid = PlotGrid::new(HeadlessBackend::new());
    assert_eq!(rejected_size(grid.set_grid_size(1, 5)), Some((1, 5)));
    assert_eq!(rejected_size(grid.set_grid_size(5, 1)), Some((5, 1)));
    assert_eq!(grid.grid_size(), (1, 1));
    grid.add_point(0, 0, 0.0, 0.0).unwrap();
}

#[test]
fn test_shrinking_grid_drops_plots() {
    let grid = PlotGrid::new(HeadlessBackend::new());
    grid.set_grid_size(3, 3).unwrap();
    grid.add_point(8, 0, 0.0, 0.0).unwrap();
    grid.add_point(1, 0, 0.0, 0.0).unwrap();

    grid.set_grid_size(2, 2).unwrap();
    assert!(grid.plot_exists(1));
    assert!(!grid.plot_exists(8));
    assert!(grid.add_point(8, 0, 0.0, 0.0).is_err());
}

#[test]
fn test_auto_refresh_stops_when_disabled() {
    let backend = HeadlessBackend::new();
    let stats = backend.stats();
    let grid = PlotGrid::new(backend);

    grid.enable_auto_refresh(Duration::from_millis(50));
    let start = stats.redraws();
    let ticked = wait_until(Duration::from_secs(5), || stats.redraws() >= start + 2);
    assert!(ticked);

    grid.disable_auto_refresh();
    assert!(!grid.is_auto_refreshing());
    let stopped = stats.redraws();
    thread::sleep(Duration::from_millis(150));
    assert_eq!(stats.redraws(), stopped);
}

#[test]
fn test_zero_period_disables_auto_refresh() {
    let grid = PlotGrid::new(HeadlessBackend::new());
    grid.enable_auto_refresh(Duration::from_millis(20));
    assert!(grid.is_auto_refreshing());
    grid.enable_auto_refresh(Duration::ZERO);
    assert!(!grid.is_auto_refreshing());
}

#[test]
fn test_producers_and_auto_refresh_run_concurrently() {
    let grid = Arc::new(PlotGrid::new(HeadlessBackend::new()));
    grid.set_grid_size(2, 2).unwrap();
    for plot in 0..4 {
        grid.auto_x_range(plot).unwrap();
        grid.auto_y_range(plot).unwrap();
    }
    grid.enable_auto_refresh(Duration::from_millis(1));

    let producers: Vec<_> = (0..4)
        .map(|plot| {
            let grid = Arc::clone(&grid);
            thread::spawn(move || {
                for i in 0..2_000 {
                    let curve = (i % 16) as CurveId;
                    let x = i as f32;
                    grid.add_point(plot, curve, x, (x * 0.01).sin()).unwrap();
                    if i % 7 == 0 {
                        grid.remove_first_point(plot, curve).unwrap();
                    }
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().unwrap();
    }
    grid.disable_auto_refresh();

    for plot in 0..4 {
        let curves = grid.with_plot(plot, |p| p.engine().curve_count()).unwrap();
        assert_eq!(curves, 16);
        let (min, max) = grid.with_plot(plot, |p| p.engine().x_range()).unwrap();
        assert!(min <= max);
    }
    grid.refresh();
    grid.with_plots(|plots| {
        for plot in plots.iter().flatten() {
            assert!(plot.with_surface(|s| s.is_balanced()));
        }
    });
}

#[test]
fn test_grids_sharing_refresh_lock() {
    let lock = RefreshLock::new();
    let config = GridConfig::default();
    let a = PlotGrid::with_refresh_lock(HeadlessBackend::new(), config.clone(), lock.clone());
    let b = PlotGrid::with_refresh_lock(HeadlessBackend::new(), config, lock);
    let (a, b) = (a.unwrap(), b.unwrap());
    a.enable_auto_refresh(Duration::from_millis(1));
    b.enable_auto_refresh(Duration::from_millis(1));
    for i in 0..200 {
        a.add_point(0, 0, i as f32, 0.0).unwrap();
        b.add_point(0, 0, i as f32, 0.0).unwrap();
    }
    a.quit();
    b.quit();
    assert!(!a.is_auto_refreshing() && !b.is_auto_refreshing());
}

#[test]
fn test_toggle_button_follows_label_state() {
    let grid = PlotGrid::new(HeadlessBackend::new());
    assert_eq!(grid.with_plot(0, |p| p.toggle_button().text).unwrap(), "+");
    grid.with_plot(0, Plot::on_toggle_button).unwrap();
    assert_eq!(grid.with_plot(0, |p| p.toggle_button().text).unwrap(), "-");
    grid.hide_labels(0).unwrap();
    assert_eq!(grid.with_plot(0, |p| p.toggle_button().text).unwrap(), "+");
}

#[test]
fn test_mouse_readout_through_grid() {
    let grid = PlotGrid::new(HeadlessBackend::new());
    grid.set_x_range(0, -1.0, 1.0).unwrap();
    let center = Point::new(352.5, 210.0);
    let events = [
        (MouseEvent::Enter, Point::ORIGIN),
        (MouseEvent::Move, center),
    ];
    for (event, at) in events {
        grid.handle_mouse_event(0, event, at).unwrap();
    }
    grid.refresh();

    let cursor = grid.with_plot(0, |p| p.engine().cursor_position());
    let p = cursor.unwrap().unwrap();
    approx::assert_abs_diff_eq!(p.x, 0.0, epsilon = 1e-4);
    approx::assert_abs_diff_eq!(p.y, 5.0, epsilon = 1e-4);
}
