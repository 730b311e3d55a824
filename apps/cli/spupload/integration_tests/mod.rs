mod exit_code;
