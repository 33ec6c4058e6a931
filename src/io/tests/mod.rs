mod access_mode_tests;
