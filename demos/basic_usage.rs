//! Basic usage example for FlixFluent
//!
//! Plays one of the demo videos on the simulated embed host, steps the
//! widget forward and prints what a UI would render: the active subtitle,
//! its selectable words and the player state.

use flixfluent::{
    Event, EventFilter, FilteredEventStream, FlixFluent, SimulatedEmbedHost, DEMO_VIDEO_URLS,
};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let flix = FlixFluent::from_env();
    flix.init_logging()?;

    let host = Arc::new(SimulatedEmbedHost::new().with_duration(60.0));
    let mut player = flix.player().embed_host(host.clone()).build()?;
    let mut subtitles = FilteredEventStream::new(player.events(), EventFilter::subtitles_only());

    println!("🎬 Loading {}", DEMO_VIDEO_URLS[0]);
    player.load(DEMO_VIDEO_URLS[0]).await?;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let widget = host
        .last_player()
        .ok_or_else(|| anyhow::anyhow!("embed host created no widget"))?;

    for _ in 0..6 {
        widget.advance(2.5);
        tokio::time::sleep(Duration::from_millis(600)).await;

        while let Ok(Some(event)) = subtitles.try_next() {
            if let Event::SubtitleChanged { text } = event {
                println!("💬 {}", text);
                for word in player.annotate(&text) {
                    if let Some(gloss) = &word.translation {
                        println!("   {} → {}", word.text, gloss);
                    }
                }
            }
        }
    }

    let rate = player.cycle_playback_rate().await?;
    println!("⏩ Playback rate now {}", rate);
    player.skip_forward().await?;

    let state = player.snapshot()?;
    println!(
        "📊 {:.1}s / {:?}s ({:.0}%), playing: {}",
        state.current_time_seconds, state.duration_seconds, state.progress_percent, state.is_playing
    );

    let analysis = player.analyze_word("안녕하세요").await;
    println!("🔍 안녕하세요: {}", analysis.meaning.join(", "));

    player.unload().await;
    println!("✅ Done, {} timers left", player.total_active_timers());
    Ok(())
}
