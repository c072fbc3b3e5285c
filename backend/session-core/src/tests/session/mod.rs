mod listeners;
mod store;
