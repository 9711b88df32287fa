mod claude_test;
