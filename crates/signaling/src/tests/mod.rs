//! Verhaltenstests des PeerConnectionChannel mit Mock-Kollaborateuren


mod publish_tests;
mod subscribe_tests;
