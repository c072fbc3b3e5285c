mod host_input;
