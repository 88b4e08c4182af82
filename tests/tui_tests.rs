mod common;

use std::time::Instant;

use tempfile::TempDir;

use common::{at, task, with_due};
use taskscope::config::Config;
use taskscope::search::DateRange;
use taskscope::storage::Storage;
use taskscope::tui::app::App;

#[test]
fn test_tick_rolls_the_view_over_at_midnight() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::new(dir.path());
    storage
        .save_tasks(&[with_due(task(1, "Renew passport"), at(2024, 3, 15, 9, 0))])
        .unwrap();
    let mut app = App::new(storage, &Config::with_data_dir(dir.path())).unwrap();

    app.search.set_date_range(DateRange::Today);
    app.refresh_at(at(2024, 3, 15, 23, 30));
    assert_eq!(app.visible.len(), 1);

    assert!(!app.tick_at(Instant::now(), at(2024, 3, 15, 23, 59)));
    assert_eq!(app.visible.len(), 1);

    assert!(app.tick_at(Instant::now(), at(2024, 3, 16, 0, 1)));
    assert!(app.visible.is_empty());
    assert_eq!(app.state.selected(), None);
}
