use drawcast::application::algorithms::{HotColdAnalyzer, PredictionAlgorithm, PredictionContext};
use drawcast::domain::lottery::GameType;
use drawcast::infrastructure::sources::generate_draws;
use std::thread;

#[test]
fn test_window_updates_race_predictions() {
    let draws = generate_draws(GameType::Mega645, 80, 7).unwrap();
    let range = GameType::Mega645.range();
    let analyzer = HotColdAnalyzer::new(1.2);
    let hot_windows = [20usize, 8, 30];
    let cold_windows = [15usize, 6, 25];

    thread::scope(|s| {
        for writer in 0..2 {
            let analyzer = &analyzer;
            s.spawn(move || {
                for i in 0..300 {
                    let pick = 1 + (i + writer) % 2;
                    analyzer.set_hot_window(hot_windows[pick]).unwrap();
                    analyzer.set_cold_window(cold_windows[pick]).unwrap();
                    analyzer.set_weight(if pick == 1 { 0.5 } else { 1.5 }).unwrap();
                }
            });
        }
        for _ in 0..4 {
            let analyzer = &analyzer;
            let draws = &draws;
            s.spawn(move || {
                for _ in 0..100 {
                    let ctx = PredictionContext::new(range, draws);
                    let prediction = analyzer.predict(&ctx).unwrap();

                    let values = prediction.numbers.as_slice();
                    assert_eq!(values.len(), 6);
                    assert!(values.windows(2).all(|w| w[0] < w[1]));
                    assert!(values.iter().all(|&v| range.contains(v)));

                    let hot: usize = prediction.metadata["hot_window"].parse().unwrap();
                    let cold: usize = prediction.metadata["cold_window"].parse().unwrap();
                    assert!(hot_windows.contains(&hot), "hot window {}", hot);
                    assert!(cold_windows.contains(&cold), "cold window {}", cold);
                    assert!([1.2, 0.5, 1.5].contains(&analyzer.weight()));
                }
            });
        }
    });

    assert!([8, 30].contains(&analyzer.hot_window()));
    assert!([6, 25].contains(&analyzer.cold_window()));
    assert!(analyzer.set_hot_window(HotColdAnalyzer::MIN_WINDOW - 1).is_err());
}
