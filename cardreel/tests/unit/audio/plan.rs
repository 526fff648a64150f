use super::*;

const BGM: &str = "https://cdn.example.com/bgm.mp3";
const SFX: &str = "https://cdn.example.com/whoosh.mp3";
const NARRATION: &str = "data:audio/mp3;base64,SUQz";

fn fixture() -> Project {
    Project::from_json(include_str!("../../fixtures/project_basic.json")).unwrap()
}

fn all_assets() -> LocalAssets {
    let mut a = LocalAssets::new();
    a.insert(BGM, "/work/bgm.mp3");
    a.insert(NARRATION, "/work/inline_001.mp3");
    a.insert(SFX, "/work/whoosh.mp3");
    a
}

#[test]
fn tracks_follow_bgm_then_card_order() {
    let plan = AudioMixPlan::from_project(&fixture(), &all_assets());
    let kinds: Vec<_> = plan.tracks.iter().map(|t| t.kind).collect();
    assert_eq!(kinds, vec![TrackKind::Bgm, TrackKind::Narration, TrackKind::Sfx]);
    assert_eq!(plan.tracks[0].volume, 0.25);
    assert_eq!(plan.tracks[2].offset_secs, 2.0);
    assert_eq!(plan.tracks[2].volume, 0.5);
    assert!(plan.skipped.is_empty());
}

#[test]
fn filter_graph_delays_everything_but_bgm() {
    let plan = AudioMixPlan::from_project(&fixture(), &all_assets());
    assert_eq!(
        plan.filter_graph().unwrap(),
        "[0:a]volume=0.25[a0];[1:a]volume=1[a1];[2:a]volume=0.5,adelay=2000|2000[a2];\
         [a0][a1][a2]amix=inputs=3:duration=longest:normalize=0[aout]"
    );
}

#[test]
fn single_track_skips_amix() {
    let mut assets = LocalAssets::new();
    assets.insert(SFX, "/work/whoosh.mp3");
    let plan = AudioMixPlan::from_project(&fixture(), &assets);
    assert_eq!(plan.skipped, vec![BGM.to_owned(), NARRATION.to_owned()]);
    assert_eq!(
        plan.filter_graph().unwrap(),
        "[0:a]volume=0.5,adelay=2000|2000[aout]"
    );
}

#[test]
fn missing_assets_give_an_empty_plan() {
    let plan = AudioMixPlan::from_project(&fixture(), &LocalAssets::new());
    assert!(plan.is_empty());
    assert_eq!(plan.skipped.len(), 3);
    assert!(plan.filter_graph().is_none());
}

#[test]
fn zero_tts_volume_is_kept() {
    let mut project = fixture();
    project.script_cards[0].tts_volume = 0.0;
    let plan = AudioMixPlan::from_project(&project, &all_assets());
    assert_eq!(plan.tracks[1].volume, 0.0);
}

#[test]
fn delays_round_to_milliseconds() {
    let t = AudioTrack {
        kind: TrackKind::Sfx,
        path: PathBuf::from("x.mp3"),
        offset_secs: 1.2346,
        volume: 1.0,
    };
    assert_eq!(t.delay_ms(), 1235);
}
