use dynamic_compose_lib::TranslateMessage;

pub mod convert;
pub mod migrate;
#[cfg(feature = "json_schema")]
pub mod schema;

pub(crate) fn print_messages(messages: &[TranslateMessage]) {
    messages.iter().for_each(|message| eprintln!("{}", message));
}
