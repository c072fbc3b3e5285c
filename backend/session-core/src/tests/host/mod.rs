mod address_bar;
mod host_app;
mod messages;
