// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod support;

pub mod resolver_tests;
pub mod registry_tests;
pub mod proxy_tests;
