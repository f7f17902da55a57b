pub mod emote;
