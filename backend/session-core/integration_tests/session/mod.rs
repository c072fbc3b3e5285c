mod initialize;
mod messages;
mod refresh;
mod requests;
