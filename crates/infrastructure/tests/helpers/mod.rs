pub mod mock_dns_server;
