mod array_it_tests;
mod key_tests;
mod object_it_tests;
mod revise_tests;
mod scenario_tests;
