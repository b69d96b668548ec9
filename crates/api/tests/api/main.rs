mod failures;
mod helpers;
