mod host_app;
