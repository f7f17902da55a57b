pub mod twitch_api;
