pub mod background_dispatcher;
pub mod browser_url_opener;
pub mod dry_run;
pub mod process_audio_player;
